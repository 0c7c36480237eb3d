// Root of the 'gateway' integration test crate; the tests live in
// tests/gateway/.

mod gateway {
    mod auth_tests;
    mod handlers_tests;
}
