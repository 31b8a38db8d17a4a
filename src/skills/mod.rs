mod load;
mod record;

pub use load::{load_skills, parse_skills};
pub(crate) use record::name_key;
pub use record::{MAX_LEVEL, Skill};
