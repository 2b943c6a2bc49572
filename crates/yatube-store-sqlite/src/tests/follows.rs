use yatube_core::{Error, follow::FollowGraph, store::FeedStore};

use super::{shared_store, user};

#[tokio::test]
async fn follow_then_unfollow() {
  let s = shared_store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let graph = FollowGraph::new(s.clone());

  graph.follow(&leo, &ann).await.unwrap();
  assert!(graph.is_following(leo.id, ann.id).await.unwrap());
  assert!(graph.following_set_of(leo.id).await.unwrap().contains(&ann.id));
  // Edges are directed.
  assert!(!graph.is_following(ann.id, leo.id).await.unwrap());

  graph.unfollow(leo.id, ann.id).await.unwrap();
  assert!(!graph.is_following(leo.id, ann.id).await.unwrap());
  assert!(!graph.following_set_of(leo.id).await.unwrap().contains(&ann.id));
}

#[tokio::test]
async fn following_twice_leaves_one_edge() {
  let s = shared_store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let graph = FollowGraph::new(s.clone());

  graph.follow(&leo, &ann).await.unwrap();
  let err = graph.follow(&leo, &ann).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateFollow(ref name) if name == "ann"));

  assert_eq!(s.following_authors_of(leo.id).await.unwrap().len(), 1);

  // One unfollow removes the only edge.
  graph.unfollow(leo.id, ann.id).await.unwrap();
  assert!(!s.follows_exist(leo.id, ann.id).await.unwrap());
}

#[tokio::test]
async fn concurrent_follows_leave_one_edge() {
  let s = shared_store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let graph = FollowGraph::new(s.clone());

  let attempts: Vec<_> = (0..8)
    .map(|_| {
      let graph = graph.clone();
      let (leo, ann) = (leo.clone(), ann.clone());
      tokio::spawn(async move { graph.follow(&leo, &ann).await })
    })
    .collect();

  let mut successes = 0;
  for attempt in attempts {
    match attempt.await.unwrap() {
      Ok(_) => successes += 1,
      Err(Error::DuplicateFollow(_)) => {}
      Err(e) => panic!("unexpected error: {e}"),
    }
  }

  assert_eq!(successes, 1);
  assert_eq!(s.following_authors_of(leo.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn self_follow_is_rejected_without_writing() {
  let s = shared_store().await;
  let leo = user(&s, "leo").await;
  let graph = FollowGraph::new(s.clone());

  let err = graph.follow(&leo, &leo).await.unwrap_err();
  assert!(matches!(err, Error::SelfFollow));
  assert!(graph.following_set_of(leo.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unfollow_without_edge_is_ok() {
  let s = shared_store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let graph = FollowGraph::new(s);

  graph.unfollow(leo.id, ann.id).await.unwrap();
  graph.unfollow_by_username(leo.id, "nobody").await.unwrap();
}

#[tokio::test]
async fn follow_by_username() {
  let s = shared_store().await;
  let leo = user(&s, "leo").await;
  let ann = user(&s, "ann").await;
  let graph = FollowGraph::new(s);

  graph.follow_by_username(&leo, "ann").await.unwrap();
  assert!(graph.is_following(leo.id, ann.id).await.unwrap());

  let err = graph.follow_by_username(&leo, "ghost").await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));

  graph.unfollow_by_username(leo.id, "ann").await.unwrap();
  assert!(!graph.is_following(leo.id, ann.id).await.unwrap());
}

#[tokio::test]
async fn following_set_of_many_authors() {
  let s = shared_store().await;
  let leo = user(&s, "leo").await;
  let graph = FollowGraph::new(s.clone());

  let mut expected = std::collections::BTreeSet::new();
  for name in ["ann", "bob", "cy"] {
    let author = user(&s, name).await;
    graph.follow(&leo, &author).await.unwrap();
    expected.insert(author.id);
  }
  // Many users may follow the same author.
  let bob = s.get_user_by_username("bob".into()).await.unwrap().unwrap();
  let ann = s.get_user_by_username("ann".into()).await.unwrap().unwrap();
  graph.follow(&ann, &bob).await.unwrap();

  assert_eq!(graph.following_set_of(leo.id).await.unwrap(), expected);
}
