mod concurrency;
mod error_cases;
mod scenarios;
