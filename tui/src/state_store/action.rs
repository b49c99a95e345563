use comms::card::Card;

#[derive(Debug, Clone)]
pub enum Action {
    ConnectToServerRequest { addr: String },
    Join { name: String },
    Vote { card: Card },
    Reset,
    Leave,
    SetTaskDescription { text: String },
    Exit,
}
