pub mod assignment_state;
pub mod codes;
pub mod page;
pub mod records;

pub use assignment_state::AssignmentState;
pub use codes::{ErrorCode, SuccessCode};
pub use page::{Page, PageRequest, ResponseEnvelope, SortDirection, SortOrder};
pub use records::{
    Asset, AssetState, Assignment, Category, CategoryReport, EditAsset, Gender, NewAsset,
    NewAssignment, NewUser, Role, UpdateUser, User,
};
