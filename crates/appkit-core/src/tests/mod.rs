// Cross-module integration tests
#[cfg(test)]
mod integration;
