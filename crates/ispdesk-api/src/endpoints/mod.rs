// Endpoint groups, implemented as inherent methods on `BackofficeClient`.

mod auth;
mod clients;
mod connections;
mod dashboard;
mod hotspot;
