use blackanchor_data::RoomId;

/// Notifications the (out-of-scope, §1) session layer sends into the game thread's control
/// channel, mirroring the teacher's `ControlMessage::AddClient`/`RemoveClient` shape but scoped
/// to what this core actually needs: room touches and combat-initiating commands.
#[derive(Clone, Debug)]
pub enum ControlMessage {
    /// A session stepped into `room_id`; drives §4.I's on-room-entry sequence.
    RoomTouched { room_id: RoomId },
    /// A session issued `attack <target>`; starts or joins that room's combat.
    AttackCommand {
        room_id: RoomId,
        attacker_name: String,
        target_name: String,
    },
}
