/// Events emitted while handling intents and peer messages.
/// The presentation layer consumes these for sound and status text.

use crate::domain::actor::{AnchorName, PlayerId};
use crate::domain::geom::Vec3;
use crate::domain::question::DrawnQuestion;

/// How an accepted move was supported.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Grip {
    WallHold,
    BodyHold { partner: PlayerId, anchor: AnchorName },
}

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    /// Local move accepted. `grip` says what held the climber.
    PlayerMoved { player: PlayerId, position: Vec3, grip: Grip },
    /// Position written from a peer message, unvalidated.
    RemoteMoved { player: PlayerId, position: Vec3 },
    AnchorHighlighted { owner: PlayerId, anchor: AnchorName, on: bool },
    /// The one event the host UI must react to: open the question panel.
    QuestionTriggered(DrawnQuestion),
    QuestionDismissed { id: u8 },
    Interacted { player: PlayerId },
    SummitReached,
}
