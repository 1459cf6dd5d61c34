pub mod app;
pub mod factory;
pub mod queue;

#[allow(unused_imports)]
pub use app::TestApp;
#[allow(unused_imports)]
pub use factory::Factory;
#[allow(unused_imports)]
pub use queue::FlakyQueue;
