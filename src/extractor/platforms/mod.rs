// Platform parsers, in default registry order

pub mod xiaohongshu;
pub mod instagram;
pub mod bilibili;
pub mod generic;

pub use xiaohongshu::XiaohongshuParser;
pub use instagram::InstagramParser;
pub use bilibili::BilibiliParser;
pub use generic::GenericParser;
