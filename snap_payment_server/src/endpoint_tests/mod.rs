mod helpers;
mod mocks;

mod admin;
mod checkout;
mod status;
mod webhook;
