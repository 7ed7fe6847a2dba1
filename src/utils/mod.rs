pub mod logging;
pub mod masked_input;
#[cfg(test)]
pub mod test_utils;
pub mod url;
