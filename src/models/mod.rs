pub mod forecast;
pub mod market;
pub mod price;
