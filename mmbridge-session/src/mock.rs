//! Scripted in-memory [`ChatApi`] for tests.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use mmbridge_core::constants::CURRENT_USER_ID;
use mmbridge_core::error::{BridgeError, Result};
use mmbridge_core::traits::ChatApi;
use mmbridge_core::types::{Channel, ChannelMember, NewPost, Post, PostList, Team, User};

#[derive(Default)]
struct State {
    me: Option<User>,
    users: HashMap<String, User>,
    teams: Vec<Team>,
    channels: Vec<Channel>,
    posts: HashMap<String, PostList>,
    search: HashMap<String, PostList>,
    members: HashMap<String, Vec<ChannelMember>>,
    created: Vec<Post>,
    failures: HashMap<&'static str, VecDeque<BridgeError>>,
    delays: HashMap<&'static str, Duration>,
    calls: HashMap<&'static str, usize>,
    args: HashMap<&'static str, Vec<String>>,
}

pub(crate) struct MockChatApi {
    state: Mutex<State>,
}

impl MockChatApi {
    pub(crate) fn new() -> Self {
        let state = State {
            me: Some(User::new("bot-user-id", "bot")),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub(crate) fn with_user(self, user: User) -> Self {
        self.state.lock().users.insert(user.id.clone(), user);
        self
    }

    pub(crate) fn with_team(self, team: Team) -> Self {
        self.state.lock().teams.push(team);
        self
    }

    pub(crate) fn with_channel(self, channel: Channel) -> Self {
        self.state.lock().channels.push(channel);
        self
    }

    pub(crate) fn with_posts(self, channel_id: &str, posts: PostList) -> Self {
        self.state.lock().posts.insert(channel_id.to_string(), posts);
        self
    }

    pub(crate) fn with_search(self, team_id: &str, results: PostList) -> Self {
        self.state.lock().search.insert(team_id.to_string(), results);
        self
    }

    pub(crate) fn with_members(self, channel_id: &str, members: Vec<ChannelMember>) -> Self {
        self.state.lock().members.insert(channel_id.to_string(), members);
        self
    }

    /// Fails the next `times` calls to `operation` with `message`.
    pub(crate) fn fail_next(&self, operation: &'static str, times: usize, message: &str) {
        let mut state = self.state.lock();
        let queue = state.failures.entry(operation).or_default();
        for _ in 0..times {
            queue.push_back(BridgeError::api(message));
        }
    }

    pub(crate) fn fail_next_with(&self, operation: &'static str, error: BridgeError) {
        self.state.lock().failures.entry(operation).or_default().push_back(error);
    }

    /// Delays every call to `operation`.
    pub(crate) fn delay(&self, operation: &'static str, delay: Duration) {
        self.state.lock().delays.insert(operation, delay);
    }

    pub(crate) fn calls(&self, operation: &str) -> usize {
        self.state.lock().calls.get(operation).copied().unwrap_or(0)
    }

    /// Arguments passed to `operation`, in call order.
    pub(crate) fn args(&self, operation: &str) -> Vec<String> {
        self.state.lock().args.get(operation).cloned().unwrap_or_default()
    }

    pub(crate) fn created(&self) -> Vec<Post> {
        self.state.lock().created.clone()
    }

    async fn enter(&self, operation: &'static str, arg: &str) -> Result<()> {
        let (delay, failure) = {
            let mut state = self.state.lock();
            *state.calls.entry(operation).or_default() += 1;
            state.args.entry(operation).or_default().push(arg.to_string());
            let failure = state.failures.get_mut(operation).and_then(VecDeque::pop_front);
            (state.delays.get(operation).copied(), failure)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), Err)
    }
}

fn not_found(what: &str) -> BridgeError {
    BridgeError::api_status(404, format!("{what} not found"))
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn login(&self, login_id: &str, _password: &str) -> Result<()> {
        self.enter("login", login_id).await
    }

    async fn logout(&self) -> Result<()> {
        self.enter("logout", "").await
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.enter("get_user", user_id).await?;
        let state = self.state.lock();
        let user = if user_id == CURRENT_USER_ID {
            state.me.clone()
        } else {
            state.users.get(user_id).cloned()
        };
        user.ok_or_else(|| not_found("user"))
    }

    async fn get_user_teams(&self) -> Result<Vec<Team>> {
        self.enter("get_user_teams", "").await?;
        Ok(self.state.lock().teams.clone())
    }

    async fn get_channels_for_user(&self, team_id: &str) -> Result<Vec<Channel>> {
        self.enter("get_channels_for_user", team_id).await?;
        Ok(self
            .state
            .lock()
            .channels
            .iter()
            .filter(|c| c.team_id.as_deref() == Some(team_id))
            .cloned()
            .collect())
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Channel> {
        self.enter("get_channel", channel_id).await?;
        self.state
            .lock()
            .channels
            .iter()
            .find(|c| c.id == channel_id)
            .cloned()
            .ok_or_else(|| not_found("channel"))
    }

    async fn get_channel_by_name(&self, team_id: &str, channel_name: &str) -> Result<Channel> {
        self.enter("get_channel_by_name", channel_name).await?;
        self.state
            .lock()
            .channels
            .iter()
            .find(|c| c.index_key() == Some((team_id, channel_name)))
            .cloned()
            .ok_or_else(|| not_found("channel"))
    }

    async fn get_posts_for_channel(
        &self,
        channel_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PostList> {
        self.enter("get_posts_for_channel", &format!("{channel_id}:{page}:{per_page}"))
            .await?;
        Ok(self.state.lock().posts.get(channel_id).cloned().unwrap_or_default())
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        self.enter("create_post", &post.channel_id).await?;
        let mut state = self.state.lock();
        let created = Post {
            id: format!("created-{}", state.created.len() + 1),
            channel_id: post.channel_id,
            user_id: state.me.as_ref().map(|u| u.id.clone()).unwrap_or_default(),
            message: post.message,
            create_at: 1_728_057_600_000,
            root_id: post.root_id,
        };
        state.created.push(created.clone());
        Ok(created)
    }

    async fn search_team_posts(&self, team_id: &str, terms: &str) -> Result<PostList> {
        self.enter("search_team_posts", terms).await?;
        Ok(self.state.lock().search.get(team_id).cloned().unwrap_or_default())
    }

    async fn get_channel_members(&self, channel_id: &str) -> Result<Vec<ChannelMember>> {
        self.enter("get_channel_members", channel_id).await?;
        Ok(self.state.lock().members.get(channel_id).cloned().unwrap_or_default())
    }
}

/// Builds a post list in the given order.
pub(crate) fn post_list(posts: Vec<Post>) -> PostList {
    PostList {
        order: posts.iter().map(|p| p.id.clone()).collect(),
        posts: posts.into_iter().map(|p| (p.id.clone(), p)).collect(),
    }
}

pub(crate) fn post(id: &str, channel_id: &str, user_id: &str, create_at: i64) -> Post {
    Post {
        id: id.to_string(),
        channel_id: channel_id.to_string(),
        user_id: user_id.to_string(),
        message: format!("message {id}"),
        create_at,
        root_id: None,
    }
}
