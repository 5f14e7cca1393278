pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, RegisterInput, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod household_service;
pub mod household_service_impl;
pub use household_service::{
    HouseholdDto, HouseholdError, HouseholdService, JoinCodeDto, MemberDto,
};
pub use household_service_impl::SeaOrmHouseholdService;

pub mod item_service;
pub mod item_service_impl;
pub use item_service::{CategoryDto, ItemDto, ItemError, ItemService, ItemWrite, UnitDto};
pub use item_service_impl::SeaOrmItemService;

pub mod essential;
pub use essential::{EssentialError, EssentialItemService, EssentialStatus};

pub mod preparedness;
pub use preparedness::{PreparednessError, PreparednessReport, PreparednessService};

pub mod news;
pub use news::{DefaultNewsService, ManualArticle, NewsDto, NewsError, NewsRefreshStats, NewsService};

pub mod mail;
pub use mail::{MailError, MailService};

pub mod map;
pub use map::{MapError, MapService, PolygonGeometry, ShelterDto, ZoneDto, ZoneNode, ZoneWrite};

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod token;
pub use token::{Claims, TokenError, TokenIssuer};
