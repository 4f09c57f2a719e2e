/// Stages of one tick, run in [`TickStage::ORDER`] by both roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickStage {
    /// Resync requests for identities that failed to resolve
    Identity,
    /// Local input sampling, remote edge settling
    Input,
    /// Broadcast or update-elapsed notification
    Replication,
    /// Flush of queued remote calls
    Rpc,
}

impl TickStage {
    pub const ORDER: [TickStage; 4] = [
        TickStage::Identity,
        TickStage::Input,
        TickStage::Replication,
        TickStage::Rpc,
    ];
}
