//! Database schemas for Waypoint
//!
//! Defines MongoDB document structures for mindmaps, learning paths,
//! clicked nodes, quizzes, users, daily activity, and streak rewards.
//!
//! Serde renames keep the original camelCase document field names so
//! existing data and clients keep working.

mod clicked_node;
mod learning_path;
mod mindmap;
mod quiz;
mod streak_reward;
mod user;
mod user_activity;

pub use clicked_node::{ClickedNodeDoc, CLICKED_NODE_COLLECTION};
pub use learning_path::{ConceptNode, LearningPathDoc, NodeStatus, LEARNING_PATH_COLLECTION};
pub use mindmap::{MindmapDoc, MINDMAP_COLLECTION};
pub use quiz::{QuizDoc, QuizQuestion, QUIZ_COLLECTION};
pub use streak_reward::{StreakRewardDoc, STREAK_REWARD_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
pub use user_activity::{UserActivityDoc, USER_ACTIVITY_COLLECTION};
