pub mod http;
pub mod tipranks;
pub mod yahoo;

pub use http::HttpClient;
pub use tipranks::{TipRanksArticle, TipRanksClient};
pub use yahoo::YahooClient;
