pub mod dtos;
pub mod jwt;
pub mod middleware;
