pub mod remote_readings;

pub use remote_readings::RemoteReadingSink;
