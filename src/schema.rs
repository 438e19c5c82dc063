diesel::table! {
    feed_follows (id) {
        id -> Int8,
        user_id -> Int8,
        feed_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    feeds (id) {
        id -> Int8,
        name -> Text,
        link -> Text,
        user_id -> Int8,
        last_fetched_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    posts (id) {
        id -> Int8,
        feed_id -> Int8,
        title -> Text,
        description -> Nullable<Text>,
        link -> Text,
        published_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        id -> Int8,
        name -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(feed_follows -> feeds (feed_id));
diesel::joinable!(feed_follows -> users (user_id));
diesel::joinable!(feeds -> users (user_id));
diesel::joinable!(posts -> feeds (feed_id));

diesel::allow_tables_to_appear_in_same_query!(feed_follows, feeds, posts, users);
