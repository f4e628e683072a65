// 接口数据模型
pub mod common;
pub mod spot;
pub mod user;

pub use common::ResponseData;
pub use spot::{CreateSpotRequest, FishingSpot, SpotListData, SpotQuery};
pub use user::{
    LoginData, LoginRequest, RegisterRequest, User, UserProfile, UserProfileUpdate, UserStats,
};
