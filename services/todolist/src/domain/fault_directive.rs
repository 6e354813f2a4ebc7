// フォールト注入ディレクティブ
//
// Todoアイテム本文に埋め込まれた指示を解析する。モニタリングのデモ用に、
// 例外・遅延・エラーステータスを意図的に発生させるためのもの。
//
// - `!exception <message>`: 呼び出しを失敗させる
// - `!slow <ms>`: 指定ミリ秒だけ応答を遅らせる
// - `!error <code>`: 400以上のステータスコードでエラー応答を返す

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static EXCEPTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!exception (.+)").expect("exceptionパターンが不正"));

static SLOW_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!slow (\d+)").expect("slowパターンが不正"));

static ERROR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!error (\d{3})").expect("errorパターンが不正"));

/// エラー応答として扱う最小ステータスコード
const MIN_ERROR_STATUS: u16 = 400;

/// アイテム本文から抽出したディレクティブ
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaultDirectives {
    /// 例外メッセージ
    pub exception: Option<String>,
    /// 応答遅延
    pub delay: Option<Duration>,
    /// エラー応答ステータス（400以上のみ）
    pub error_status: Option<u16>,
}

impl FaultDirectives {
    /// アイテム本文を解析する
    ///
    /// 各ディレクティブは最初に一致したものだけを採用する。
    pub fn parse(item: &str) -> Self {
        let exception = EXCEPTION_PATTERN
            .captures(item)
            .map(|caps| caps[1].to_string());

        let delay = SLOW_PATTERN
            .captures(item)
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .map(Duration::from_millis);

        let error_status = ERROR_PATTERN
            .captures(item)
            .and_then(|caps| caps[1].parse::<u16>().ok())
            .filter(|status| *status >= MIN_ERROR_STATUS);

        Self {
            exception,
            delay,
            error_status,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exception.is_none() && self.delay.is_none() && self.error_status.is_none()
    }
}

/// `?delay=<ms>`クエリ値を解析する（数値でなければNone）
pub fn parse_delay_param(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}
