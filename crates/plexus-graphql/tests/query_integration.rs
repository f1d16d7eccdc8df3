//! Integration tests for query and mutation execution.
//!
//! These tests run real queries against the dynamic schema, backed by the
//! in-memory store wrapped in a call counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_graphql::Request;
use async_graphql::dynamic::Schema;
use axum::http::StatusCode;
use plexus_db_memory::MemoryStore;
use plexus_graphql::handler::GraphQLRequest;
use plexus_graphql::{
    GraphQLConfig, GraphQLContext, GraphQLContextBuilder, GraphQLState, SchemaBuilderConfig,
    SchemaRegistry, SocialSchemaBuilder, execute,
};
use plexus_storage::{
    DynStore, EdgeDirection, MemberType, MemberTypeId, NewPost, NewProfile, NewUser, Post,
    PostPatch, Profile, ProfilePatch, SocialStore, StorageError, SubscriptionEdge, User,
    UserPatch,
};
use serde_json::{Value, json};
use uuid::Uuid;

// =============================================================================
// Counting Store
// =============================================================================

/// Read calls observed by [`CountingStore`].
#[derive(Default)]
struct Calls {
    users_by_ids: AtomicUsize,
    member_types_by_ids: AtomicUsize,
    posts_by_author: AtomicUsize,
    profiles_by_user: AtomicUsize,
    profiles_by_member_type: AtomicUsize,
    edges: AtomicUsize,
}

fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Delegates to a memory store and counts the bulk lookups.
struct CountingStore {
    inner: MemoryStore,
    calls: Calls,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            calls: Calls::default(),
        }
    }
}

#[async_trait::async_trait]
impl SocialStore for CountingStore {
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, StorageError> {
        self.calls.users_by_ids.fetch_add(1, Ordering::SeqCst);
        self.inner.find_users_by_ids(ids).await
    }

    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, StorageError> {
        self.inner.find_posts_by_ids(ids).await
    }

    async fn find_profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, StorageError> {
        self.inner.find_profiles_by_ids(ids).await
    }

    async fn find_member_types_by_ids(
        &self,
        ids: &[MemberTypeId],
    ) -> Result<Vec<MemberType>, StorageError> {
        self.calls.member_types_by_ids.fetch_add(1, Ordering::SeqCst);
        self.inner.find_member_types_by_ids(ids).await
    }

    async fn find_posts_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> Result<Vec<Post>, StorageError> {
        self.calls.posts_by_author.fetch_add(1, Ordering::SeqCst);
        self.inner.find_posts_by_author_ids(author_ids).await
    }

    async fn find_profiles_by_user_ids(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<Profile>, StorageError> {
        self.calls.profiles_by_user.fetch_add(1, Ordering::SeqCst);
        self.inner.find_profiles_by_user_ids(user_ids).await
    }

    async fn find_profiles_by_member_type_ids(
        &self,
        member_type_ids: &[MemberTypeId],
    ) -> Result<Vec<Profile>, StorageError> {
        self.calls.profiles_by_member_type.fetch_add(1, Ordering::SeqCst);
        self.inner.find_profiles_by_member_type_ids(member_type_ids).await
    }

    async fn find_edges(
        &self,
        direction: EdgeDirection,
        user_ids: &[Uuid],
    ) -> Result<Vec<SubscriptionEdge>, StorageError> {
        self.calls.edges.fetch_add(1, Ordering::SeqCst);
        self.inner.find_edges(direction, user_ids).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        self.inner.list_users().await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StorageError> {
        self.inner.list_posts().await
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        self.inner.list_profiles().await
    }

    async fn list_member_types(&self) -> Result<Vec<MemberType>, StorageError> {
        self.inner.list_member_types().await
    }

    async fn create_user(&self, input: NewUser) -> Result<User, StorageError> {
        self.inner.create_user(input).await
    }

    async fn create_post(&self, input: NewPost) -> Result<Post, StorageError> {
        self.inner.create_post(input).await
    }

    async fn create_profile(&self, input: NewProfile) -> Result<Profile, StorageError> {
        self.inner.create_profile(input).await
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, StorageError> {
        self.inner.update_user(id, patch).await
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post, StorageError> {
        self.inner.update_post(id, patch).await
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: ProfilePatch,
    ) -> Result<Profile, StorageError> {
        self.inner.update_profile(id, patch).await
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StorageError> {
        self.inner.delete_user(id).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StorageError> {
        self.inner.delete_post(id).await
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool, StorageError> {
        self.inner.delete_profile(id).await
    }

    async fn insert_edge(
        &self,
        subscriber_id: Uuid,
        author_id: Uuid,
    ) -> Result<SubscriptionEdge, StorageError> {
        self.inner.insert_edge(subscriber_id, author_id).await
    }

    async fn delete_edge(&self, subscriber_id: Uuid, author_id: Uuid) -> Result<bool, StorageError> {
        self.inner.delete_edge(subscriber_id, author_id).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

struct Harness {
    schema: Schema,
    store: Arc<CountingStore>,
}

impl Harness {
    fn new() -> Self {
        let schema = SocialSchemaBuilder::new(
            Arc::new(SchemaRegistry::social()),
            SchemaBuilderConfig::default(),
        )
        .build()
        .expect("schema builds");

        Self {
            schema,
            store: Arc::new(CountingStore::new()),
        }
    }

    fn dyn_store(&self) -> DynStore {
        self.store.clone()
    }

    fn context(&self) -> GraphQLContext {
        GraphQLContextBuilder::new()
            .with_store(self.dyn_store())
            .with_config(GraphQLConfig {
                batch_delay_ms: 20,
                ..GraphQLConfig::default()
            })
            .with_request_id("test-request")
            .build()
            .expect("context builds")
    }

    /// Executes one request with a fresh context and returns the JSON response.
    async fn run(&self, query: &str) -> Value {
        let response = self
            .schema
            .execute(Request::new(query).data(self.context()))
            .await;
        serde_json::to_value(&response).expect("response serializes")
    }

    async fn user(&self, name: &str) -> User {
        self.store
            .create_user(NewUser {
                name: name.to_string(),
                balance: 10.0,
            })
            .await
            .unwrap()
    }

    async fn post(&self, author: &User, title: &str) -> Post {
        self.store
            .create_post(NewPost {
                title: title.to_string(),
                content: format!("{title} body"),
                author_id: author.id,
            })
            .await
            .unwrap()
    }

    async fn profile(&self, user: &User, member_type_id: MemberTypeId) -> Profile {
        self.store
            .create_profile(NewProfile {
                is_male: false,
                year_of_birth: 1990,
                member_type_id,
                user_id: user.id,
            })
            .await
            .unwrap()
    }
}

fn assert_no_errors(response: &Value) {
    assert!(
        response.get("errors").is_none_or(|e| e.as_array().is_none_or(Vec::is_empty)),
        "unexpected errors: {response}"
    );
}

fn error_code(response: &Value) -> &str {
    response["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_default()
}

fn names(list: &Value) -> Vec<&str> {
    let mut names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    names
}

// =============================================================================
// Batching and Eager Loading
// =============================================================================

#[tokio::test]
async fn test_users_posts_use_one_bulk_call() {
    let h = Harness::new();
    for name in ["a", "b", "c", "d"] {
        let user = h.user(name).await;
        h.post(&user, &format!("{name}-1")).await;
        h.post(&user, &format!("{name}-2")).await;
    }

    let response = h.run("{ users { name posts { title } } }").await;

    assert_no_errors(&response);
    let users = response["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 4);
    for user in users {
        assert_eq!(user["posts"].as_array().unwrap().len(), 2);
    }
    assert_eq!(count(&h.store.calls.posts_by_author), 1);
}

#[tokio::test]
async fn test_users_without_relations_skip_eager_loading() {
    let h = Harness::new();
    let user = h.user("a").await;
    h.post(&user, "p").await;

    let response = h.run("{ users { id name balance } }").await;

    assert_no_errors(&response);
    assert_eq!(count(&h.store.calls.posts_by_author), 0);
    assert_eq!(count(&h.store.calls.profiles_by_user), 0);
    assert_eq!(count(&h.store.calls.edges), 0);
}

#[tokio::test]
async fn test_post_authors_are_batched() {
    let h = Harness::new();
    for name in ["a", "b", "c"] {
        let user = h.user(name).await;
        h.post(&user, "x").await;
        h.post(&user, "y").await;
    }

    let response = h.run("{ posts { title author { name } } }").await;

    assert_no_errors(&response);
    assert_eq!(response["data"]["posts"].as_array().unwrap().len(), 6);
    assert_eq!(count(&h.store.calls.users_by_ids), 1);
}

#[tokio::test]
async fn test_same_key_loaded_twice_fetches_once() {
    let h = Harness::new();
    let user = h.user("alice").await;

    let query = format!(
        r#"{{ a: user(id: "{id}") {{ name }} b: user(id: "{id}") {{ name }} }}"#,
        id = user.id
    );
    let response = h.run(&query).await;

    assert_no_errors(&response);
    assert_eq!(response["data"]["a"]["name"], "alice");
    assert_eq!(response["data"]["b"]["name"], "alice");
    assert_eq!(count(&h.store.calls.users_by_ids), 1);
}

#[tokio::test]
async fn test_missing_user_is_null() {
    let h = Harness::new();

    let query = format!(r#"{{ user(id: "{}") {{ name }} }}"#, Uuid::new_v4());
    let response = h.run(&query).await;

    assert_no_errors(&response);
    assert_eq!(response["data"]["user"], Value::Null);
}

#[tokio::test]
async fn test_users_edges_need_no_extra_user_fetch() {
    let h = Harness::new();
    let a = h.user("a").await;
    let b = h.user("b").await;
    let c = h.user("c").await;
    h.store.insert_edge(b.id, a.id).await.unwrap();
    h.store.insert_edge(c.id, a.id).await.unwrap();

    let response = h
        .run("{ users { name userSubscribedTo { name } subscribedToUser { name } } }")
        .await;

    assert_no_errors(&response);
    let users = response["data"]["users"].as_array().unwrap();
    let a_row = users.iter().find(|u| u["name"] == "a").unwrap();
    assert_eq!(names(&a_row["subscribedToUser"]), vec!["b", "c"]);
    let b_row = users.iter().find(|u| u["name"] == "b").unwrap();
    assert_eq!(names(&b_row["userSubscribedTo"]), vec!["a"]);

    assert_eq!(count(&h.store.calls.edges), 2);
    assert_eq!(count(&h.store.calls.users_by_ids), 0);
}

#[tokio::test]
async fn test_user_eager_loads_distant_users_in_one_fetch() {
    let h = Harness::new();
    let reader = h.user("reader").await;
    for name in ["x", "y", "z"] {
        let author = h.user(name).await;
        h.store.insert_edge(reader.id, author.id).await.unwrap();
    }

    let query = format!(
        r#"{{ user(id: "{}") {{ name profile {{ id }} userSubscribedTo {{ name }} }} }}"#,
        reader.id
    );
    let response = h.run(&query).await;

    assert_no_errors(&response);
    assert_eq!(response["data"]["user"]["profile"], Value::Null);
    assert_eq!(
        names(&response["data"]["user"]["userSubscribedTo"]),
        vec!["x", "y", "z"]
    );
    // One fetch for the user itself, one for the authors across the edges.
    assert_eq!(count(&h.store.calls.users_by_ids), 2);
    assert_eq!(count(&h.store.calls.edges), 1);
    assert_eq!(count(&h.store.calls.profiles_by_user), 1);
}

#[tokio::test]
async fn test_member_type_profiles_are_batched() {
    let h = Harness::new();
    for (name, tier) in [
        ("a", MemberTypeId::Basic),
        ("b", MemberTypeId::Business),
        ("c", MemberTypeId::Basic),
    ] {
        let user = h.user(name).await;
        h.profile(&user, tier).await;
    }

    let response = h
        .run("{ memberTypes { id profiles { yearOfBirth memberType { discount } } } }")
        .await;

    assert_no_errors(&response);
    let tiers = response["data"]["memberTypes"].as_array().unwrap();
    let basic = tiers.iter().find(|t| t["id"] == "basic").unwrap();
    assert_eq!(basic["profiles"].as_array().unwrap().len(), 2);
    assert_eq!(count(&h.store.calls.profiles_by_member_type), 1);
    // memberTypes primes the tier cache.
    assert_eq!(count(&h.store.calls.member_types_by_ids), 0);
}

// =============================================================================
// Depth Guard
// =============================================================================

fn state(h: &Harness) -> GraphQLState {
    GraphQLState {
        schema: h.schema.clone(),
        store: h.dyn_store(),
        config: Arc::new(GraphQLConfig::default()),
    }
}

fn request(query: &str) -> GraphQLRequest {
    GraphQLRequest {
        query: query.to_string(),
        operation_name: None,
        variables: None,
    }
}

#[tokio::test]
async fn test_depth_over_limit_is_rejected_without_data() {
    let h = Harness::new();
    h.user("a").await;

    let (status, body) = execute(
        &state(&h),
        request("{ users { posts { author { posts { author { posts { title } } } } } } }"),
        "req".into(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.data.is_none());
    assert_eq!(body.errors[0]["extensions"]["code"], "DEPTH_EXCEEDED");
    assert_eq!(count(&h.store.calls.posts_by_author), 0);
}

#[tokio::test]
async fn test_depth_at_limit_executes() {
    let h = Harness::new();
    h.user("a").await;

    let (status, body) = execute(
        &state(&h),
        request("{ users { posts { author { posts { author { name } } } } } }"),
        "req".into(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.errors.is_empty());
    assert!(body.data.is_some());
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_create_user_and_post_end_to_end() {
    let h = Harness::new();

    let created = h
        .run(r#"mutation { createUser(dto: { name: "Alice", balance: 100 }) { id } }"#)
        .await;
    assert_no_errors(&created);
    let user_id = created["data"]["createUser"]["id"].as_str().unwrap().to_string();

    let post = h
        .run(&format!(
            r#"mutation {{ createPost(dto: {{ title: "Hi", content: "first", authorId: "{user_id}" }}) {{ id authorId }} }}"#
        ))
        .await;
    assert_no_errors(&post);
    assert_eq!(post["data"]["createPost"]["authorId"], user_id.as_str());

    let before = count(&h.store.calls.posts_by_author);
    let response = h
        .run(&format!(
            r#"{{ user(id: "{user_id}") {{ name posts {{ title }} }} }}"#
        ))
        .await;

    assert_no_errors(&response);
    assert_eq!(
        response["data"],
        json!({ "user": { "name": "Alice", "posts": [{ "title": "Hi" }] } })
    );
    assert_eq!(count(&h.store.calls.posts_by_author) - before, 1);
}

#[tokio::test]
async fn test_create_post_for_missing_author_is_constraint_violation() {
    let h = Harness::new();

    let response = h
        .run(&format!(
            r#"mutation {{ createPost(dto: {{ title: "t", content: "c", authorId: "{}" }}) {{ id }} }}"#,
            Uuid::new_v4()
        ))
        .await;

    assert_eq!(error_code(&response), "CONSTRAINT_VIOLATION");
    assert!(h.store.list_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_change_user_keeps_unspecified_fields() {
    let h = Harness::new();
    let user = h.user("before").await;

    let response = h
        .run(&format!(
            r#"mutation {{ changeUser(id: "{}", dto: {{ name: "after" }}) {{ name balance }} }}"#,
            user.id
        ))
        .await;

    assert_no_errors(&response);
    assert_eq!(
        response["data"]["changeUser"],
        json!({ "name": "after", "balance": 10.0 })
    );
}

#[tokio::test]
async fn test_change_missing_post_is_not_found() {
    let h = Harness::new();

    let response = h
        .run(&format!(
            r#"mutation {{ changePost(id: "{}", dto: {{ title: "x" }}) {{ id }} }}"#,
            Uuid::new_v4()
        ))
        .await;

    assert_eq!(error_code(&response), "NOT_FOUND");
}

#[tokio::test]
async fn test_change_profile_member_type() {
    let h = Harness::new();
    let user = h.user("a").await;
    let profile = h.profile(&user, MemberTypeId::Basic).await;

    let response = h
        .run(&format!(
            r#"mutation {{ changeProfile(id: "{}", dto: {{ memberTypeId: business }}) {{ memberTypeId yearOfBirth memberType {{ postsLimitPerMonth }} }} }}"#,
            profile.id
        ))
        .await;

    assert_no_errors(&response);
    let changed = &response["data"]["changeProfile"];
    assert_eq!(changed["memberTypeId"], "business");
    assert_eq!(changed["yearOfBirth"], 1990);
}

#[tokio::test]
async fn test_second_profile_is_rejected_and_original_kept() {
    let h = Harness::new();
    let user = h.user("a").await;
    let original = h.profile(&user, MemberTypeId::Basic).await;

    let response = h
        .run(&format!(
            r#"mutation {{ createProfile(dto: {{ isMale: true, yearOfBirth: 2000, userId: "{}", memberTypeId: business }}) {{ id }} }}"#,
            user.id
        ))
        .await;

    assert_eq!(error_code(&response), "CONSTRAINT_VIOLATION");

    let profiles = h.store.find_profiles_by_user_ids(&[user.id]).await.unwrap();
    assert_eq!(profiles, vec![original]);
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    h.post(&alice, "gone").await;
    let profile = h.profile(&alice, MemberTypeId::Basic).await;
    h.store.insert_edge(bob.id, alice.id).await.unwrap();
    h.store.insert_edge(alice.id, bob.id).await.unwrap();

    let response = h
        .run(&format!(r#"mutation {{ deleteUser(id: "{}") }}"#, alice.id))
        .await;
    assert_no_errors(&response);
    assert_eq!(response["data"]["deleteUser"], true);

    let check = h
        .run(&format!(
            r#"{{ user(id: "{}") {{ id }} profile(id: "{}") {{ id }} posts {{ id }} users {{ name userSubscribedTo {{ name }} subscribedToUser {{ name }} }} }}"#,
            alice.id, profile.id
        ))
        .await;
    assert_no_errors(&check);
    assert_eq!(check["data"]["user"], Value::Null);
    assert_eq!(check["data"]["profile"], Value::Null);
    assert_eq!(check["data"]["posts"], json!([]));
    assert_eq!(
        check["data"]["users"],
        json!([{ "name": "bob", "userSubscribedTo": [], "subscribedToUser": [] }])
    );

    let again = h
        .run(&format!(r#"mutation {{ deleteUser(id: "{}") }}"#, alice.id))
        .await;
    assert_eq!(again["data"]["deleteUser"], false);
}

#[tokio::test]
async fn test_subscribe_and_unsubscribe() {
    let h = Harness::new();
    let author = h.user("author").await;
    let reader = h.user("reader").await;

    let subscribed = h
        .run(&format!(
            r#"mutation {{ subscribeTo(userId: "{}", authorId: "{}") {{ name userSubscribedTo {{ name }} }} }}"#,
            reader.id, author.id
        ))
        .await;
    assert_no_errors(&subscribed);
    assert_eq!(
        subscribed["data"]["subscribeTo"],
        json!({ "name": "reader", "userSubscribedTo": [{ "name": "author" }] })
    );

    let duplicate = h
        .run(&format!(
            r#"mutation {{ subscribeTo(userId: "{}", authorId: "{}") {{ id }} }}"#,
            reader.id, author.id
        ))
        .await;
    assert_eq!(error_code(&duplicate), "CONSTRAINT_VIOLATION");

    let unsubscribe = format!(
        r#"mutation {{ unsubscribeFrom(userId: "{}", authorId: "{}") }}"#,
        reader.id, author.id
    );
    let removed = h.run(&unsubscribe).await;
    assert_no_errors(&removed);
    assert_eq!(removed["data"]["unsubscribeFrom"], true);

    let check = h
        .run(&format!(
            r#"{{ user(id: "{}") {{ userSubscribedTo {{ name }} }} }}"#,
            reader.id
        ))
        .await;
    assert_eq!(check["data"]["user"]["userSubscribedTo"], json!([]));

    let again = h.run(&unsubscribe).await;
    assert_eq!(error_code(&again), "CONSTRAINT_VIOLATION");
    assert_eq!(h.store.inner.edge_count().await, 0);
}

#[tokio::test]
async fn test_invalid_uuid_argument_is_rejected() {
    let h = Harness::new();

    let response = h.run(r#"{ user(id: "not-a-uuid") { name } }"#).await;

    assert!(response["errors"].as_array().is_some_and(|e| !e.is_empty()));
    assert_eq!(count(&h.store.calls.users_by_ids), 0);
}
