pub mod chapter_markers;
pub mod course_progress;
pub mod header;
pub mod lesson_page;
pub mod lesson_tabs;
pub mod lessons_sidebar;
pub mod session_hooks;
pub mod video_player;

pub use chapter_markers::ChapterMarkers;
pub use course_progress::CourseProgressCard;
pub use header::{Breadcrumbs, Header};
pub use lesson_page::LessonPage;
pub use lesson_tabs::LessonTabs;
pub use lessons_sidebar::LessonsSidebar;
pub use session_hooks::use_session;
pub use video_player::VideoPlayer;
