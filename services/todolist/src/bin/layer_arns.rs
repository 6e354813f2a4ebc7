/// OneAgentレイヤーARN解決ツール
///
/// デプロイ設定（JSON）からリージョン・接続ベースURL・PaaSトークンを読み取り、
/// Dynatraceのバージョンレジストリに問い合わせて最新のOneAgentレイヤーARNを出力する。
/// デプロイツールの設定解決時に呼び出すことを想定している。
///
/// # 参照する設定
/// - provider.region
/// - custom.OneAgentConfig.DT_CONNECTION_BASE_URL
/// - custom.queryOneAgentLayerARNs.paasToken（無ければ環境変数DT_PAAS_TOKEN）
///
/// # 使用例
/// ```bash
/// serverless print --format json > serverless.json
///
/// # 全ランタイム
/// cargo run --bin layer_arns -- --config serverless.json
///
/// # 特定ランタイムのみ
/// cargo run --bin layer_arns -- --config serverless.json --runtime nodejs
///
/// # 旧エンドポイント
/// cargo run --bin layer_arns -- --config serverless.json --endpoint legacy
/// ```
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use todolist::application::LayerArnResolver;
use todolist::domain::{RegistryEndpoint, SUPPORTED_RUNTIMES};
use todolist::infrastructure::resolver_config::DEFAULT_REQUEST_TIMEOUT_SECS;
use todolist::infrastructure::{
    HttpRegistryClient, JsonConfigurationSource, ResolverConfig, init_cli_logging,
};
use tracing::{error, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 問い合わせ先エンドポイント
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EndpointArg {
    /// /api/v1/deployment/lambda/agent/latest
    Current,
    /// /api/v1/deployment/agent/lambda/latest
    Legacy,
}

impl From<EndpointArg> for RegistryEndpoint {
    fn from(arg: EndpointArg) -> Self {
        match arg {
            EndpointArg::Current => RegistryEndpoint::Current,
            EndpointArg::Legacy => RegistryEndpoint::Legacy,
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "layer_arns")]
#[command(about = "最新のOneAgentレイヤーARNをDynatraceレジストリから解決")]
struct CliArgs {
    /// レンダリング済みデプロイ設定（JSON）のパス
    #[arg(long, short = 'c')]
    config: PathBuf,

    /// 指定したランタイムのARNだけを出力する
    #[arg(long, short = 'r')]
    runtime: Option<String>,

    /// レジストリのエンドポイント
    #[arg(long, value_enum, default_value_t = EndpointArg::Current)]
    endpoint: EndpointArg,

    /// リクエストタイムアウト（秒）
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_cli_logging();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "レイヤーARNの解決に失敗");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// 解決を実行し、標準出力に書くJSONを返す
async fn run(args: CliArgs) -> Result<String, BoxError> {
    let source = JsonConfigurationSource::from_file(&args.config)?;

    let config = ResolverConfig::from_env()
        .with_endpoint(args.endpoint.into())
        .with_request_timeout(Duration::from_secs(args.timeout_secs));
    let client = HttpRegistryClient::new(&config)?;
    let resolver = LayerArnResolver::new(client, &config);

    match args.runtime {
        Some(runtime) => {
            if !SUPPORTED_RUNTIMES.contains(&runtime.as_str()) {
                warn!(runtime = %runtime, supported = ?SUPPORTED_RUNTIMES, "既知のランタイムではありません");
            }
            let arn = resolver.resolve_for_runtime(&source, &runtime).await?;
            Ok(serde_json::to_string(&arn)?)
        }
        None => {
            let arns = resolver.resolve(&source).await?;
            Ok(serde_json::to_string_pretty(&arns)?)
        }
    }
}
