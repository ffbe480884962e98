// Helpers for testing providers without a network.
//
// - `MockHttpClient`: an `HttpClient` that replays scripted responses per
//   endpoint and records every request it receives.

pub mod mock_http;

pub use mock_http::{MockHttpClient, RecordedRequest, RequestMethod};
