#[cfg(test)]
mod host_tests;
