// Event system test module
#[cfg(test)]
mod binding_tests;
