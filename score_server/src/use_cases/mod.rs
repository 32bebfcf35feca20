pub mod feed;
pub mod queries;
pub mod submit_score;

#[cfg(test)]
pub(crate) mod test_support;
