use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

/// Соединение с Redis. Очередь писем - обычный список, воркер забирает задачи с хвоста.
#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn connect(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(RedisClient { conn })
    }

    /// LPUSH задачи в очередь; возвращает длину очереди
    pub async fn enqueue(&self, queue: &str, payload: &str) -> redis::RedisResult<usize> {
        let mut conn = self.conn.clone();
        conn.lpush(queue, payload).await
    }
}
