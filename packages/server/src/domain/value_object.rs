//! Value Object 定義
//!
//! 識別子・メッセージ本文・時刻など、不変でバリデーション済みの値を表します。
//! 生成時にバリデーションを行うため、生成後の値は常に有効です。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// UserId の最大長
pub const MAX_USER_ID_LEN: usize = 64;

/// メッセージ本文の最大文字数
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// 認証済みユーザーの識別子
///
/// 認証は外部のコラボレーターが行うため、ここでは形式のみを検証します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyUserId);
        }
        if trimmed.chars().count() > MAX_USER_ID_LEN {
            return Err(ValueObjectError::UserIdTooLong(MAX_USER_ID_LEN));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValueObjectError::InvalidUserId(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Defines an opaque identifier backed by a string and generated from a UUID v4.
macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $err:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ValueObjectError::$err);
                }
                Ok(Self(trimmed.to_string()))
            }

            /// 新しい識別子を生成
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// トランスポート層のハンドシェイクごとに一意な接続識別子
    ConnectionId,
    EmptyConnectionId
);
opaque_id!(
    /// チャット（2 者間の会話）の識別子
    ChatId,
    EmptyChatId
);
opaque_id!(
    /// 永続化されたメッセージの識別子
    MessageId,
    EmptyMessageId
);
opaque_id!(
    /// リアルタイム配信される通知の識別子
    NotificationId,
    EmptyNotificationId
);

/// メッセージ本文
///
/// 前後の空白は取り除かれ、空文字列は拒否されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyMessage);
        }
        if trimmed.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ValueObjectError::MessageTooLong(MAX_MESSAGE_CHARS));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（UTC, ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 2 者間チャットの参加者ペア
///
/// 順序を持たない: `(a, b)` と `(b, a)` は同じペアとして扱われます。
/// 同一ユーザー同士のペアは作成できません。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    first: UserId,
    second: UserId,
}

impl ParticipantPair {
    pub fn new(a: UserId, b: UserId) -> Result<Self, ValueObjectError> {
        if a == b {
            return Err(ValueObjectError::SelfChat(a.into_string()));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    pub fn contains(&self, user: &UserId) -> bool {
        &self.first == user || &self.second == user
    }

    /// ペアのうち `user` ではない方を返す（`user` が参加者でない場合は `None`）
    pub fn other(&self, user: &UserId) -> Option<&UserId> {
        if &self.first == user {
            Some(&self.second)
        } else if &self.second == user {
            Some(&self.first)
        } else {
            None
        }
    }

    pub fn users(&self) -> [&UserId; 2] {
        [&self.first, &self.second]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_user_id_is_trimmed() {
        // テスト項目: UserId の前後の空白が取り除かれる
        // given (前提条件):
        let raw = "  alice ".to_string();

        // when (操作):
        let result = UserId::new(raw);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_user_id_rejects_empty_and_inner_whitespace() {
        // テスト項目: 空文字列・内部空白を含む UserId は拒否される
        // given (前提条件):
        let empty = "   ".to_string();
        let spaced = "al ice".to_string();

        // when (操作):
        let empty_result = UserId::new(empty);
        let spaced_result = UserId::new(spaced);

        // then (期待する結果):
        assert_eq!(empty_result, Err(ValueObjectError::EmptyUserId));
        assert!(matches!(
            spaced_result,
            Err(ValueObjectError::InvalidUserId(_))
        ));
    }

    #[test]
    fn test_user_id_rejects_too_long() {
        // テスト項目: 最大長を超える UserId は拒否される
        // given (前提条件):
        let long = "a".repeat(MAX_USER_ID_LEN + 1);

        // when (操作):
        let result = UserId::new(long);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::UserIdTooLong(MAX_USER_ID_LEN))
        );
    }

    #[test]
    fn test_message_content_rejects_blank() {
        // テスト項目: 空白のみのメッセージは EmptyMessage になる
        // given (前提条件):
        let blank = " \n\t ".to_string();

        // when (操作):
        let result = MessageContent::new(blank);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyMessage));
    }

    #[test]
    fn test_message_content_length_limit() {
        // テスト項目: 上限ちょうどは受理され、超過は拒否される
        // given (前提条件):
        let at_limit = "あ".repeat(MAX_MESSAGE_CHARS);
        let over_limit = "あ".repeat(MAX_MESSAGE_CHARS + 1);

        // when (操作):
        let ok = MessageContent::new(at_limit);
        let too_long = MessageContent::new(over_limit);

        // then (期待する結果):
        assert!(ok.is_ok());
        assert_eq!(
            too_long,
            Err(ValueObjectError::MessageTooLong(MAX_MESSAGE_CHARS))
        );
    }

    #[test]
    fn test_generated_ids_are_unique() {
        // テスト項目: generate() で生成される識別子は毎回異なる
        // when (操作):
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
    }

    #[test]
    fn test_participant_pair_is_unordered() {
        // テスト項目: ペアは順序によらず等しい
        // given (前提条件):
        let ab = ParticipantPair::new(user("alice"), user("bob")).unwrap();
        let ba = ParticipantPair::new(user("bob"), user("alice")).unwrap();

        // then (期待する結果):
        assert_eq!(ab, ba);
        assert_eq!(ab.other(&user("alice")), Some(&user("bob")));
        assert_eq!(ab.other(&user("bob")), Some(&user("alice")));
        assert_eq!(ab.other(&user("carol")), None);
    }

    #[test]
    fn test_participant_pair_rejects_self_chat() {
        // テスト項目: 同一ユーザー同士のペアは作成できない
        // when (操作):
        let result = ParticipantPair::new(user("alice"), user("alice"));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::SelfChat("alice".to_string()))
        );
    }
}
