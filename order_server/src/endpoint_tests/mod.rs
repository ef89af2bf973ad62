mod auto_delivery;
mod auto_message;
mod helpers;
mod mocks;
mod notifications;
mod sweep;
