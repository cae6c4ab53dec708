// Gallery services
// Collaborator contracts, their in-memory implementations, configuration and logging.

pub mod collaborators;
pub mod config_engine;
pub mod in_memory;
pub mod logging;
