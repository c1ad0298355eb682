pub mod api {
    pub mod models {
        pub mod likes;
    }
    pub mod client;
    pub mod error;
}

pub mod error_log;
pub mod logger;
pub mod models;
pub mod utils;
