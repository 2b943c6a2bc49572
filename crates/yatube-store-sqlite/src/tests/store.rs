use yatube_core::{
  model::{NewComment, NewPost, PostChanges, PostId, UserId},
  store::{FeedStore, PostFilter},
};

use super::{group, post, store, user};

// ─── Users & groups ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;
  let leo = user(&s, "leo").await;

  let found = s.get_user_by_username("leo".into()).await.unwrap();
  assert_eq!(found, Some(leo));
  assert!(s.get_user_by_username("nobody".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  user(&s, "leo").await;
  assert!(s.create_user("leo".into()).await.is_err());
}

#[tokio::test]
async fn create_and_find_group() {
  let s = store().await;
  let g = group(&s, "test-slug").await;

  let found = s.get_group_by_slug("test-slug".into()).await.unwrap().unwrap();
  assert_eq!(found, g);
  assert!(s.get_group_by_slug("missing".into()).await.unwrap().is_none());
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_post_roundtrip() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let g = group(&s, "cats").await;

  let created = s
    .create_post(NewPost {
      author_id: leo.id,
      text:      "hello".into(),
      group_id:  Some(g.id),
      image:     Some("posts/cat.png".into()),
    })
    .await
    .unwrap();

  assert_eq!(created.author, leo);
  assert_eq!(created.group, Some(g.to_ref()));
  assert_eq!(created.image.as_deref(), Some("posts/cat.png"));

  let fetched = s.get_post(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn blank_post_text_violates_check() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let result = s
    .create_post(NewPost {
      author_id: leo.id,
      text:      "   ".into(),
      group_id:  None,
      image:     None,
    })
    .await;
  assert!(result.is_err());
}

#[tokio::test]
async fn list_posts_newest_first_with_id_tiebreak() {
  let s = store().await;
  let leo = user(&s, "leo").await;

  let mut ids = Vec::new();
  for i in 0..5 {
    ids.push(post(&s, &leo, &format!("post {i}"), None).await.id);
  }

  let listed: Vec<PostId> = s
    .list_posts(PostFilter::All)
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.id)
    .collect();
  ids.reverse();
  assert_eq!(listed, ids);
}

#[tokio::test]
async fn list_posts_filters() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let bob = user(&s, "bob").await;
  let cats = group(&s, "cats").await;

  post(&s, &leo, "leo in cats", Some(&cats)).await;
  post(&s, &leo, "leo alone", None).await;
  post(&s, &ann, "ann in cats", Some(&cats)).await;
  post(&s, &bob, "bob alone", None).await;

  let in_group = s.list_posts(PostFilter::Group(cats.id)).await.unwrap();
  assert_eq!(in_group.len(), 2);

  let by_leo = s.list_posts(PostFilter::Author(leo.id)).await.unwrap();
  assert_eq!(by_leo.len(), 2);
  assert!(by_leo.iter().all(|p| p.author.id == leo.id));

  let by_set = s
    .list_posts(PostFilter::AuthorIn([ann.id, bob.id].into()))
    .await
    .unwrap();
  assert_eq!(by_set.len(), 2);
  assert!(by_set.iter().all(|p| p.author.id != leo.id));

  let none = s.list_posts(PostFilter::AuthorIn(Default::default())).await.unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn author_set_beyond_parameter_limit() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  post(&s, &leo, "leo", None).await;
  post(&s, &ann, "ann", None).await;

  let mut authors: std::collections::BTreeSet<UserId> =
    (1_000..41_000).map(UserId).collect();
  authors.insert(leo.id);
  let filter = PostFilter::AuthorIn(authors);

  let posts = s.list_posts(filter.clone()).await.unwrap();
  assert_eq!(posts.len(), 1);
  assert_eq!(posts[0].author.id, leo.id);
  assert_eq!(s.count_posts(filter).await.unwrap(), 1);
}

#[tokio::test]
async fn followed_by_filter_reads_follow_edges() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let bob = user(&s, "bob").await;
  post(&s, &ann, "ann", None).await;
  post(&s, &bob, "bob", None).await;
  s.create_follow(leo.id, ann.id).await.unwrap();

  let feed = s.list_posts(PostFilter::FollowedBy(leo.id)).await.unwrap();
  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0].author.id, ann.id);
  assert_eq!(s.count_posts(PostFilter::FollowedBy(bob.id)).await.unwrap(), 0);
}

#[tokio::test]
async fn windowed_listing_matches_full_order() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let cats = group(&s, "cats").await;
  for i in 0..11 {
    post(&s, &leo, &format!("post {i}"), Some(&cats)).await;
  }
  post(&s, &leo, "elsewhere", None).await;
  let filter = PostFilter::Group(cats.id);

  let all = s.list_posts(filter.clone()).await.unwrap();
  assert_eq!(s.count_posts(filter.clone()).await.unwrap(), 11);
  assert_eq!(s.count_posts(PostFilter::All).await.unwrap(), 12);

  let first = s.list_posts_window(filter.clone(), 0, 10).await.unwrap();
  assert_eq!(first, all[..10]);
  let second = s.list_posts_window(filter.clone(), 10, 10).await.unwrap();
  assert_eq!(second, all[10..]);
  assert!(s.list_posts_window(filter, 20, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_post_keeps_pub_date() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let cats = group(&s, "cats").await;
  let original = post(&s, &leo, "draft", None).await;

  let updated = s
    .update_post(original.id, PostChanges {
      text:     "final".into(),
      group_id: Some(cats.id),
      image:    None,
    })
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.text, "final");
  assert_eq!(updated.group.map(|g| g.id), Some(cats.id));
  assert_eq!(updated.pub_date, original.pub_date);

  let missing = s
    .update_post(PostId(9_999), PostChanges {
      text:     "x".into(),
      group_id: None,
      image:    None,
    })
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn count_posts_by_author() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  for i in 0..3 {
    post(&s, &leo, &format!("{i}"), None).await;
  }
  post(&s, &ann, "ann", None).await;

  assert_eq!(s.count_posts_by_author(leo.id).await.unwrap(), 3);
  assert_eq!(s.count_posts_by_author(ann.id).await.unwrap(), 1);
  assert_eq!(s.count_posts_by_author(UserId(9_999)).await.unwrap(), 0);
}

// ─── Ownership on delete ─────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_group_nulls_post_group() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let cats = group(&s, "cats").await;
  let p = post(&s, &leo, "in a group", Some(&cats)).await;

  assert!(s.delete_group(cats.id).await.unwrap());

  let survivor = s.get_post(p.id).await.unwrap().unwrap();
  assert!(survivor.group.is_none());
  assert!(!s.delete_group(cats.id).await.unwrap());
}

#[tokio::test]
async fn deleting_author_cascades_posts_and_follows() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let p = post(&s, &leo, "doomed", None).await;
  s.create_follow(ann.id, leo.id).await.unwrap();

  assert!(s.delete_user(leo.id).await.unwrap());

  assert!(s.get_post(p.id).await.unwrap().is_none());
  assert!(s.following_authors_of(ann.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_comment_author_keeps_comment() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let p = post(&s, &leo, "discuss", None).await;
  s.create_comment(NewComment {
    post_id:   p.id,
    author_id: ann.id,
    text:      "first".into(),
  })
  .await
  .unwrap();

  s.delete_user(ann.id).await.unwrap();

  let comments = s.list_comments_for_post(p.id).await.unwrap();
  assert_eq!(comments.len(), 1);
  assert!(comments[0].author.is_none());
  assert_eq!(comments[0].text, "first");
}

#[tokio::test]
async fn deleting_post_cascades_comments() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let p = post(&s, &leo, "short-lived", None).await;
  s.create_comment(NewComment {
    post_id:   p.id,
    author_id: leo.id,
    text:      "bye".into(),
  })
  .await
  .unwrap();

  assert!(s.delete_post(p.id).await.unwrap());
  assert!(s.list_comments_for_post(p.id).await.unwrap().is_empty());
  assert!(!s.delete_post(p.id).await.unwrap());
}

// ─── Follow edges ────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_edge_is_unique_per_pair() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;

  assert!(s.create_follow(ann.id, leo.id).await.unwrap());
  assert!(!s.create_follow(ann.id, leo.id).await.unwrap());
  // The reverse direction is a different edge.
  assert!(s.create_follow(leo.id, ann.id).await.unwrap());

  assert!(s.follows_exist(ann.id, leo.id).await.unwrap());
  assert_eq!(s.following_authors_of(ann.id).await.unwrap().len(), 1);

  assert!(s.delete_follow(ann.id, leo.id).await.unwrap());
  assert!(!s.delete_follow(ann.id, leo.id).await.unwrap());
  assert!(!s.follows_exist(ann.id, leo.id).await.unwrap());
}

#[tokio::test]
async fn self_follow_violates_check() {
  let s = store().await;
  let leo = user(&s, "leo").await;
  assert!(s.create_follow(leo.id, leo.id).await.is_err());
}
