/// Generates the command enum and sender handles for an actor: each entry
/// becomes a variant carrying its inputs plus a oneshot for the reply, an
/// awaiting method on `CommandSender`, and a fire-and-forget method on
/// `SpawnCommandSender` for callers that cannot await.
#[macro_export]
macro_rules! command {
    (
        $(
           $(#[$docs:meta])*
           $vis:vis $name:ident($($param:ident: $input:ty),*) $(-> $output:ty)?;
        )+
    ) => {
        pub enum Command {
        $(
            $(#[$docs])*
            $name {
                $($param: $input,)*
                resp_tx: tokio::sync::oneshot::Sender<($($output)?)>,
            },
        )+
        }

        impl Command {
            pub fn new_channel() -> (CommandSender, tokio::sync::mpsc::Receiver<Command>) {
                let (tx, rx) = tokio::sync::mpsc::channel($crate::config::COMMAND_BUFFER);
                (CommandSender { tx }, rx)
            }
        }

        #[derive(Clone)]
        pub struct CommandSender {
            tx: tokio::sync::mpsc::Sender<Command>,
        }

        #[allow(non_snake_case, dead_code)]
        impl CommandSender {
        $(
            $vis async fn $name (&self, $($param: $input,)*) $(-> $output)? {
                let (resp_tx, resp_rx) = tokio::sync::oneshot::channel();
                let data = Command::$name{$($param,)* resp_tx};
                self.tx.send(data).await.unwrap();
                resp_rx.await.unwrap()
            }
        )+

            pub fn spawn(&self) -> SpawnCommandSender {
                SpawnCommandSender { tx: self.tx.clone() }
            }
        }

        pub struct SpawnCommandSender {
            tx: tokio::sync::mpsc::Sender<Command>,
        }

        #[allow(non_snake_case, dead_code)]
        impl SpawnCommandSender {
        $(
            $vis fn $name (self, $($param: $input,)*) {
                let (resp_tx, resp_rx) = tokio::sync::oneshot::channel();
                let data = Command::$name{$($param,)* resp_tx};
                let tx = self.tx;
                tokio::spawn(async move {
                    if tx.send(data).await.is_ok() {
                        let _ = resp_rx.await;
                    }
                });
            }
        )+
        }
    };
}
