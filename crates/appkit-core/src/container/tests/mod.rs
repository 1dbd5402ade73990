// Container test module
#[cfg(test)]
mod registry_tests;
