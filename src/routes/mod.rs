pub(crate) mod admin;
pub(crate) mod health;
pub(crate) mod recommendations;
pub(crate) mod stocks;
