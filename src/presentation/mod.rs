/// プレゼンテーション層モジュール
///
/// ドメイン層の状態とUI表示の橋渡しを行います。
/// プレゼンテーション層はドメイン層に依存しますが、その逆はありません。
///
/// # モジュール
/// - `input`: ユーザー入力処理（シェル入力、確認プロンプト）
/// - `output`: コマンド結果の出力（人間向け・機械向け）
/// - `progress`: ワークフロー状態の表示DTO変換
/// - `sink`: 状態スナップショットの出力先
pub mod input;
pub mod output;
pub mod progress;
pub mod sink;
