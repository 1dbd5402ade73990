#[cfg(test)]
mod registration_tests;
