use canvas_host::headless::HeadlessHost;
use canvas_host::{
    DriverResource, HostImage, HostTextureSlot, ImageDesc, NativeHandle, RenderingDevice,
    TextureFormat, TextureUsage,
};

fn desc(width: u32, height: u32) -> ImageDesc {
    ImageDesc {
        width,
        height,
        format: TextureFormat::Rgba8,
        usage: TextureUsage::CANVAS,
    }
}

#[test]
fn texture_starts_zeroed_and_accepts_matching_updates() {
    let mut host = HeadlessHost::new("opengl3");
    let image = host.allocate_image(&desc(4, 2)).unwrap();
    let tex = host
        .create_from_external_image(image, TextureFormat::Rgba8, TextureUsage::CANVAS)
        .unwrap();

    let initial = host.texture(tex).unwrap();
    assert_eq!(initial.updates(), 0);
    assert!(initial.content().data().iter().all(|&b| b == 0));

    let pixels = HostImage::from_data(4, 2, TextureFormat::Rgba8, vec![7; 32]).unwrap();
    host.update(tex, &pixels).unwrap();
    let updated = host.texture(tex).unwrap();
    assert_eq!(updated.updates(), 1);
    assert_eq!(updated.content(), &pixels);
}

#[test]
fn mismatched_update_is_rejected() {
    let mut host = HeadlessHost::new("opengl3");
    let image = host.allocate_image(&desc(4, 4)).unwrap();
    let tex = host
        .create_from_external_image(image, TextureFormat::Rgba8, TextureUsage::CANVAS)
        .unwrap();
    let wrong = HostImage::empty(2, 2, TextureFormat::Rgba8);
    assert!(host.update(tex, &wrong).is_err());
}

#[test]
fn driver_resources_are_opt_in() {
    let host = HeadlessHost::new("vulkan").with_driver_resource(DriverResource::LogicalDevice, 0xd0);
    assert_eq!(host.current_backend_name(), "vulkan");
    assert_eq!(host.driver_resource(DriverResource::LogicalDevice, None), Some(0xd0));
    assert_eq!(host.driver_resource(DriverResource::CommandQueue, None), None);
}

#[test]
fn texture_format_query_requires_a_known_image() {
    let mut host =
        HeadlessHost::new("vulkan").with_driver_resource(DriverResource::TextureDataFormat, 37);
    let image = host.allocate_image(&desc(1, 1)).unwrap();
    assert_eq!(
        host.driver_resource(DriverResource::TextureDataFormat, Some(image)),
        Some(37)
    );
    assert_eq!(
        host.driver_resource(DriverResource::TextureDataFormat, Some(NativeHandle::from_raw(1))),
        None
    );
    assert_eq!(host.driver_resource(DriverResource::TextureDataFormat, None), None);
}

#[test]
fn free_releases_bookkeeping() {
    let mut host = HeadlessHost::new("opengl3");
    let image = host.allocate_image(&desc(1, 1)).unwrap();
    let tex = host
        .create_from_external_image(image, TextureFormat::Rgba8, TextureUsage::CANVAS)
        .unwrap();
    assert_eq!((host.live_images(), host.live_textures()), (1, 1));
    host.free(tex);
    host.free_image(image);
    assert_eq!((host.live_images(), host.live_textures()), (0, 0));
}

#[test]
fn zero_sized_allocation_fails() {
    let mut host = HeadlessHost::new("opengl3");
    assert!(host.allocate_image(&desc(0, 8)).is_err());
}
