pub mod fakes;
mod scenarios;
