pub mod draw_json;

pub use draw_json::{
    draw_start_list, draw_start_list_json, ClassDrawResponse, ClassRequest, StartListRequest,
    StartListResponse,
};
