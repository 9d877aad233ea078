pub mod listing_api;
pub mod quote_provider;

#[cfg(test)]
pub mod scripted;
