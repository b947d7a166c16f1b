pub mod agent_trait;
pub mod drain_agent;
pub mod replenish_agent;
