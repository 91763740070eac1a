mod board;
mod chat_panel;
mod game_info_panel;
mod notice;

pub use board::{square_label, BoardWidget};
pub use chat_panel::ChatPanel;
pub use game_info_panel::GameInfoPanel;
pub use notice::NoticeWidget;
