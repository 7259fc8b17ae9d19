use pratyaksh_core::api;
use pratyaksh_core::config::Config;
use pratyaksh_core::ledger::EvidenceLedger;
use pratyaksh_core::signer::VerdictSigner;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ----------------------------------------------------------------
    // 0. 加载配置
    // ----------------------------------------------------------------
    let config = Config::from_env();
    println!(
        "⚙️  配置加载完成: Host={}:{}, DB={}, Key={}",
        config.host, config.port, config.db_path, config.key_path
    );

    // ----------------------------------------------------------------
    // 1. 系统初始化 & 身份加载
    // ----------------------------------------------------------------
    println!("🛡️ [Pratyaksh 实证] 市政证据可信核验服务启动中...");

    // 加载或生成裁决签名身份
    let signer = VerdictSigner::load_or_generate(&config.key_path)?;
    let pub_key_bytes = signer.public_key().to_bytes();
    println!("🆔 服务身份ID (Public Key): {}", hex::encode(pub_key_bytes));

    // 打开证据台账 (MMR)
    let ledger = EvidenceLedger::open(&config.db_path)?;
    println!("📚 证据台账 (MMR) 初始化完成, size={}", ledger.mmr_size());

    // ----------------------------------------------------------------
    // 2. 状态共享容器
    // ----------------------------------------------------------------
    let shared_state = Arc::new(api::AppState {
        ledger: Arc::new(Mutex::new(ledger)),
        signer: Arc::new(signer),
    });

    // ----------------------------------------------------------------
    // 3. 启动 HTTP 服务
    // ----------------------------------------------------------------
    let app = api::app(shared_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    println!("🚀 API 服务已运行在: http://{}", addr);
    println!("   - POST /submit      : 提交证据照片与设备坐标进行核验");
    println!("   - GET  /audit/:pos  : 获取指定存证位置的 Merkle Proof");

    axum::serve(listener, app).await?;

    Ok(())
}
