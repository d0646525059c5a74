pub mod providers;

pub mod models;

#[cfg(test)]
pub(crate) mod test_helpers;
