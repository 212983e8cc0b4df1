//! Who may manage commands.

use talk_client::ParticipantType;

/// Participant types allowed to run `!set` and `!unset`.
pub const PRIVILEGED_PARTICIPANTS: [ParticipantType; 2] =
    [ParticipantType::OWNER, ParticipantType::MODERATOR];

pub fn is_moderator(participant_type: ParticipantType) -> bool {
    PRIVILEGED_PARTICIPANTS.contains(&participant_type)
}
