mod fakes;
mod label;
