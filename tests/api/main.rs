mod contacts;
mod health_check;
mod helpers;
