/// Query cache keys. Invalidation is by substring, so the prefixes matter.
pub mod cache_keys {
    pub const CONTENT: &str = "content";

    pub const CONTENT_STATS: &str = "content:stats";

    pub const STATS: &str = "stats";

    pub const DASHBOARD_STATS: &str = "stats:dashboard";

    pub const FEATURED: &str = "content:featured";

    pub const TRENDING: &str = "content:trending";

    pub const TAXONOMY: &str = "taxonomy";

    pub const CATEGORIES: &str = "taxonomy:categories";

    pub const GENRES: &str = "taxonomy:genres";

    #[must_use]
    pub fn content_item(id: i32) -> String {
        format!("content:item:{id}")
    }
}

/// User-facing Arabic messages.
pub mod messages {
    pub const SERVER_ERROR: &str = "حدث خطأ في الخادم. يرجى المحاولة مرة أخرى.";

    pub const CONTENT_NOT_FOUND: &str = "المحتوى غير موجود";

    pub const VALIDATION_FAILED: &str = "البيانات المرسلة غير صالحة";

    pub const REPORT_RECEIVED: &str =
        "تم إرسال التبليغ بنجاح. شكراً لك على مساعدتنا في تحسين الخدمة.";

    pub const REASON_REQUIRED: &str = "يجب اختيار سبب التبليغ";

    pub const REASON_UNKNOWN: &str = "سبب التبليغ غير معروف";

    pub const DESCRIPTION_TOO_SHORT: &str = "يجب كتابة وصف المشكلة بتفصيل أكثر";

    pub const EMAIL_INVALID: &str = "البريد الإلكتروني غير صالح";

    pub const URL_INVALID: &str = "رابط الصفحة غير صالح";

    pub const CONTENT_ID_INVALID: &str = "معرف المحتوى غير صالح";

    pub const NOT_AUTHENTICATED: &str = "يجب تسجيل الدخول أولاً";

    pub const FORBIDDEN: &str = "ليس لديك صلاحية الوصول";

    pub const INVALID_CREDENTIALS: &str = "اسم المستخدم أو كلمة المرور غير صحيحة";

    pub const TOO_MANY_LOGIN_ATTEMPTS: &str =
        "محاولات تسجيل دخول كثيرة. يرجى المحاولة لاحقاً.";

    pub const PAGE_OUT_OF_RANGE: &str = "رقم الصفحة خارج النطاق المسموح";

    pub const CACHE_CLEARED: &str = "تم مسح الذاكرة المؤقتة بنجاح";
}

pub mod limits {
    pub const MIN_REPORT_DESCRIPTION_CHARS: usize = 10;

    pub const MIN_PASSWORD_CHARS: usize = 8;

    pub const DASHBOARD_LIST_SIZE: u64 = 10;

    /// Featured and trending lists.
    pub const HIGHLIGHT_LIST_SIZE: u64 = 10;

    pub const BOOTSTRAP_PASSWORD_LENGTH: usize = 20;
}
